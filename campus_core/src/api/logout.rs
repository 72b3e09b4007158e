/// Confirmation that the session is gone.
pub type Resp = super::MessageResp;

/// Where the logout endpoint lives.
pub const PATH: &str = "/logout";
