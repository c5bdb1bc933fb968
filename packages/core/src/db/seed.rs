//! Sample breakdown loaded into a fresh store
//!
//! A small software project (four phases, five sub-tasks) so the editor has
//! something to show right after startup.

use crate::models::{Metadata, WbsNode};

struct SampleTask {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    duration: &'static str,
    effort: &'static str,
    responsible: &'static str,
    parent_id: Option<&'static str>,
    position: u32,
    level: u32,
    expanded: bool,
}

const SAMPLE_TASKS: &[SampleTask] = &[
    SampleTask {
        id: "root",
        name: "Software Development Project",
        description: "Complete software development lifecycle including planning, development, testing, and deployment phases.",
        duration: "12 weeks",
        effort: "480 hours",
        responsible: "Project Manager",
        parent_id: None,
        position: 0,
        level: 0,
        expanded: true,
    },
    SampleTask {
        id: "planning",
        name: "Planning Phase",
        description: "Project planning and requirements gathering",
        duration: "2 weeks",
        effort: "80 hours",
        responsible: "Planning Team",
        parent_id: Some("root"),
        position: 0,
        level: 1,
        expanded: true,
    },
    SampleTask {
        id: "development",
        name: "Development",
        description: "Software development implementation",
        duration: "6 weeks",
        effort: "240 hours",
        responsible: "Development Team",
        parent_id: Some("root"),
        position: 1,
        level: 1,
        expanded: true,
    },
    SampleTask {
        id: "testing",
        name: "Testing",
        description: "Quality assurance and testing",
        duration: "3 weeks",
        effort: "120 hours",
        responsible: "QA Team",
        parent_id: Some("root"),
        position: 2,
        level: 1,
        expanded: false,
    },
    SampleTask {
        id: "deployment",
        name: "Deployment",
        description: "Production deployment and go-live",
        duration: "1 week",
        effort: "40 hours",
        responsible: "DevOps Team",
        parent_id: Some("root"),
        position: 3,
        level: 1,
        expanded: true,
    },
    SampleTask {
        id: "requirements",
        name: "Requirements",
        description: "Gather and document requirements",
        duration: "5 days",
        effort: "40 hours",
        responsible: "Business Analyst",
        parent_id: Some("planning"),
        position: 0,
        level: 2,
        expanded: true,
    },
    SampleTask {
        id: "design",
        name: "System Design",
        description: "Design system architecture",
        duration: "4 days",
        effort: "32 hours",
        responsible: "System Architect",
        parent_id: Some("planning"),
        position: 1,
        level: 2,
        expanded: true,
    },
    SampleTask {
        id: "frontend",
        name: "Frontend Dev",
        description: "Frontend development tasks",
        duration: "3 weeks",
        effort: "120 hours",
        responsible: "Frontend Team",
        parent_id: Some("development"),
        position: 0,
        level: 2,
        expanded: true,
    },
    SampleTask {
        id: "backend",
        name: "Backend Dev",
        description: "Backend development tasks",
        duration: "4 weeks",
        effort: "160 hours",
        responsible: "Backend Team",
        parent_id: Some("development"),
        position: 1,
        level: 2,
        expanded: true,
    },
    SampleTask {
        id: "integration",
        name: "Integration",
        description: "System integration tasks",
        duration: "1 week",
        effort: "40 hours",
        responsible: "Integration Team",
        parent_id: Some("development"),
        position: 2,
        level: 2,
        expanded: true,
    },
];

impl SampleTask {
    fn to_node(&self) -> WbsNode {
        WbsNode {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            duration: Some(self.duration.to_string()),
            effort: Some(self.effort.to_string()),
            responsible: Some(self.responsible.to_string()),
            parent_id: self.parent_id.map(str::to_string),
            position: self.position,
            expanded: self.expanded,
            level: self.level,
            metadata: Metadata::new(),
        }
    }
}

/// The sample project, parents listed before their children
pub fn sample_nodes() -> Vec<WbsNode> {
    SAMPLE_TASKS.iter().map(SampleTask::to_node).collect()
}
