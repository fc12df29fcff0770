//! The hand-authored sample graph loaded by the demo.
//!
//! One student enrolls in one course, submits that course's assignment and
//! follows the instructor who teaches it. The instructor nests a coauthor.
//! Edges point the way the schema declares them, so `~follows` and
//! `~teaches` resolve from the instructor side.

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::{Assignment, BlankNode, Course, GeoPoint, Instructor, Link, NodeType, Student};

pub const SAMPLE_COURSE_TITLE: &str = "Graph Databases 101";

/// Build the sample graph rooted at the single student.
pub fn sample_graph() -> Student {
    let course_id = BlankNode::new("graph_course");
    let assignment_id = BlankNode::new("assignment1");

    let assignment = Assignment {
        uid: assignment_id.clone(),
        node_type: NodeType::Assignment,
        title: "Intro to Dgraph".to_string(),
        due_date: midnight_utc(2024, 2, 10),
        score: 100,
    };

    let course = Course {
        uid: course_id.clone(),
        node_type: NodeType::Course,
        title: SAMPLE_COURSE_TITLE.to_string(),
        category: "Databases".to_string(),
        difficulty_level: "Beginner".to_string(),
        assigned_in: Some(Link::node(assignment)),
    };

    let coauthor = Instructor {
        uid: BlankNode::new("prof_jane"),
        node_type: NodeType::Instructor,
        name: "Prof. Jane".to_string(),
        expertise: "Python".to_string(),
        rating: 4.6,
        teaches: None,
        coauthor: Vec::new(),
    };

    let instructor = Instructor {
        uid: BlankNode::new("dr_smith"),
        node_type: NodeType::Instructor,
        name: "Dr. Smith".to_string(),
        expertise: "Databases".to_string(),
        rating: 4.8,
        teaches: Some(Link::to(&course_id)),
        coauthor: vec![Link::node(coauthor)],
    };

    Student {
        uid: BlankNode::new("melina"),
        node_type: NodeType::Student,
        username: "melina".to_string(),
        email: "melina@example.com".to_string(),
        enrollment_date: midnight_utc(2024, 1, 10),
        location: GeoPoint::new(-103.4167, 20.6667),
        enrolled_in: Some(Link::node(course)),
        submits: Some(Link::to(&assignment_id)),
        follows: Some(Link::node(instructor)),
    }
}

fn midnight_utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
        .and_utc()
}
