//! 登录校验
//!
//! 固定的一组邮箱/密码，只决定能否进入看板，不签发令牌，也没有过期

use crate::config::Config;
use crate::error::AuthError;
use tracing::{info, warn};

pub struct SessionGate {
    email: String,
    password: String,
}

impl SessionGate {
    pub fn new(config: &Config) -> Self {
        Self {
            email: config.admin_email.clone(),
            password: config.admin_password.clone(),
        }
    }

    /// 校验登录表单，通过则可以进入看板
    pub fn check(&self, email: &str, password: &str) -> Result<(), AuthError> {
        if email == self.email && password == self.password {
            info!("🔓 登录成功: {}", email);
            Ok(())
        } else {
            warn!("登录失败: {}", email);
            Err(AuthError::InvalidCredentials)
        }
    }
}
