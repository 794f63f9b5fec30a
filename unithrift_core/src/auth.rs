//! 注册、登录、OTP 校验与个人资料

use crate::client::{page_query, Auth, MarketClient};
use crate::error::{Error, Result};
use crate::password::PasswordFlow;
use crate::session::user_id_from_token;
use crate::types::*;
use reqwest::Method;
use serde_json::json;
use tracing::{info, warn};

impl MarketClient {
    /// 邮箱密码登录，成功后写入会话
    ///
    /// 管理员登录响应不带 user_id，此时从 token 中推导。
    pub async fn login(&self, role: Role, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::InvalidParam("Please enter both email and password.".to_string()));
        }
        info!("Logging in {:?}: {}", role, email);

        let flow = match role {
            Role::Student => PasswordFlow::StudentLogin,
            Role::Admin => PasswordFlow::AdminLogin,
        };
        let data: LoginResponse = self
            .fetch(
                Method::POST,
                &format!("{}/login", role.domain()),
                &[],
                Some(json!({ "email": email.trim(), "password": flow.encode(password) })),
                Auth::Public,
            )
            .await?;

        let user_id = match data.user_id {
            Some(id) if !id.is_empty() => id,
            _ => match user_id_from_token(&data.access_token) {
                Ok(id) => id,
                Err(e) => {
                    warn!("Login response carries no user_id and none could be read from the token: {}", e);
                    String::new()
                }
            },
        };
        let session = self.store_session(&data.access_token, &user_id)?;

        info!("Logged in successfully");
        Ok(session)
    }

    /// 学生注册，成功后发送账号验证 OTP
    pub async fn signup_student(&self, mut form: StudentSignup, confirm_password: &str) -> Result<()> {
        if form.password != confirm_password {
            return Err(Error::InvalidParam("Passwords do not match.".to_string()));
        }
        info!("Signing up student: {}", form.email);
        form.password = PasswordFlow::StudentSignup.encode(&form.password);

        self.fetch::<serde_json::Value>(
            Method::POST,
            "student/create",
            &[],
            Some(serde_json::to_value(&form)?),
            Auth::Public,
        )
        .await?;

        self.send_otp(Role::Student, &form.email, VerificationType::Authentication)
            .await
    }

    /// 管理员注册
    pub async fn signup_admin(&self, mut form: AdminSignup, confirm_password: &str) -> Result<()> {
        if form.password != confirm_password {
            return Err(Error::InvalidParam("Passwords do not match.".to_string()));
        }
        info!("Signing up admin: {}", form.email);
        form.password = PasswordFlow::AdminSignup.encode(&form.password);

        self.fetch::<serde_json::Value>(
            Method::POST,
            "admin/create",
            &[],
            Some(serde_json::to_value(&form)?),
            Auth::Public,
        )
        .await?;

        self.send_otp(Role::Admin, &form.email, VerificationType::Authentication)
            .await
    }

    /// 发送 OTP 邮件（账号验证或找回密码）
    pub async fn send_otp(&self, role: Role, email: &str, kind: VerificationType) -> Result<()> {
        info!("Requesting {:?} otp for {}", kind, email);
        self.fetch::<serde_json::Value>(
            Method::POST,
            &format!("{}/send_otp", role.domain()),
            &[],
            Some(json!({ "email": email, "verification_type": kind })),
            Auth::Public,
        )
        .await?;
        Ok(())
    }

    /// 校验 OTP；找回密码流程中 `password` 即新密码
    pub async fn verify_otp(
        &self,
        role: Role,
        email: &str,
        otp: &str,
        password: &str,
        kind: VerificationType,
    ) -> Result<()> {
        if email.is_empty() || otp.is_empty() || password.is_empty() {
            return Err(Error::InvalidParam("Please fill in all the required fields.".to_string()));
        }
        let flow = match role {
            Role::Student => PasswordFlow::StudentVerifyOtp,
            Role::Admin => PasswordFlow::AdminVerifyOtp,
        };
        self.fetch::<serde_json::Value>(
            Method::POST,
            &format!("{}/verify_otp", role.domain()),
            &[],
            Some(json!({
                "email": email,
                "otp": otp,
                "password": flow.encode(password),
                "verification_type": kind,
            })),
            Auth::Public,
        )
        .await?;
        info!("OTP verified for {}", email);
        Ok(())
    }

    /// 当前学生资料
    pub async fn get_student(&self) -> Result<Student> {
        self.fetch(Method::GET, "student/get_student", &[], None, Auth::Bearer)
            .await
    }

    /// 当前管理员资料
    pub async fn get_admin(&self) -> Result<Admin> {
        self.fetch(Method::GET, "admin/get_admin", &[], None, Auth::Bearer)
            .await
    }

    /// 更新资料，只发送填写了的字段
    pub async fn update_profile(&self, role: Role, update: ProfileUpdate) -> Result<()> {
        let update = update.normalized();
        if update.is_empty() {
            return Err(Error::InvalidParam("Nothing to update".to_string()));
        }
        if role == Role::Admin && (update.phone.is_some() || update.address.is_some()) {
            return Err(Error::InvalidParam("Admins can only update their name".to_string()));
        }
        self.fetch::<serde_json::Value>(
            Method::PUT,
            &format!("{}/update", role.domain()),
            &[],
            Some(serde_json::to_value(&update)?),
            Auth::Bearer,
        )
        .await?;
        info!("Profile updated");
        Ok(())
    }

    /// 学校列表（注册页下拉框）
    pub async fn get_universities(
        &self,
        page: u32,
        page_size: u32,
        search: Option<&str>,
    ) -> Result<Vec<University>> {
        let mut query = page_query(page, page_size);
        if let Some(q) = search {
            query.push(("search_query", q.to_string()));
        }
        let paged: Paged<University> = self
            .fetch(Method::GET, "common/get_universities", &query, None, Auth::Public)
            .await?;
        Ok(paged.data)
    }

    /// 所有学生（管理员）
    pub async fn get_all_students(&self, page: u32, page_size: u32) -> Result<Vec<Student>> {
        let paged: Paged<Student> = self
            .fetch(
                Method::GET,
                "student/get_all_students",
                &page_query(page, page_size),
                None,
                Auth::Bearer,
            )
            .await?;
        Ok(paged.data)
    }
}
