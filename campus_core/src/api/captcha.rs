use serde::{Deserialize, Serialize};

/// A fresh challenge code.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Resp {
    /// The code the user has to type back.
    pub captcha: String,
}

/// Where the captcha endpoint lives.
pub const PATH: &str = "/captcha";
