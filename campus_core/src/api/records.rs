use serde::{Deserialize, Serialize};

/// One subject's marks and attendance for one semester.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Record {
    /// Whose record this is. Students only see their own, so the server
    /// leaves this out for them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Which semester
    pub semester: i64,

    /// Which subject
    pub subject: String,

    /// Marks earned
    pub marks: i64,

    /// Attendance, in percent
    pub attendance: i64,
}

/// The records visible to the current session.
pub type Resp = Vec<Record>;

/// Where students read their own records.
pub const STUDENT_PATH: &str = "/student/data";

/// Where faculty read everyone's records.
pub const FACULTY_PATH: &str = "/faculty/data";

/// Where faculty add a record.
pub const ADD_PATH: &str = "/faculty/update";

/// Adding a record only needs a message back.
pub type AddResp = super::MessageResp;

/// The role allowed to see everyone's records and add new ones.
pub const FACULTY_ROLE: &str = "faculty";

/// The role that sees only their own records.
pub const STUDENT_ROLE: &str = "student";

/// Which endpoint lists records for a role, if the role has one at all.
pub fn path_for_role(role: &str) -> Option<&'static str> {
    match role {
        STUDENT_ROLE => Some(STUDENT_PATH),
        FACULTY_ROLE => Some(FACULTY_PATH),
        _ => None,
    }
}
