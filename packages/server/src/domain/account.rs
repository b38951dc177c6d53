//! 会員アカウント

use barcart_shared::protocol::{MemberId, MemberInfo};

/// ログイン可能な会員
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub member_id: MemberId,
    pub email: String,
    pub nickname: String,
    pub password: String,
}

impl Account {
    pub fn new(
        member_id: MemberId,
        email: impl Into<String>,
        nickname: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            member_id,
            email: email.into(),
            nickname: nickname.into(),
            password: password.into(),
        }
    }

    pub fn verify_password(&self, password: &str) -> bool {
        self.password == password
    }

    /// `GET /auth/me` の応答に変換（パスワードは含めない）
    pub fn info(&self) -> MemberInfo {
        MemberInfo {
            member_id: self.member_id,
            email: self.email.clone(),
            nickname: self.nickname.clone(),
        }
    }
}
