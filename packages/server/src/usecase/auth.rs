//! UseCase: 認証（ログイン・トークン更新・アクセストークン検証）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AuthUseCase の login / refresh / authenticate
//! - アクセストークンの有効期限（TTL）
//!
//! ### なぜこのテストが必要か
//! - クライアントの single-flight refresh を結合テストで検証するには、
//!   サーバー側で「期限切れ → 401 → refresh → 成功」を確実に再現できる必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：ログイン、トークン更新、検証
//! - 異常系：パスワード誤り、不明なトークン、期限切れ
//! - revoke_access_tokens による全アクセストークンの失効

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::sync::Mutex;
use uuid::Uuid;

use barcart_shared::{
    protocol::{MemberId, TokenResponse},
    time::Clock,
};

use crate::domain::{Account, AccountRepository};

use super::error::AuthError;

#[derive(Debug, Clone, Copy)]
struct AccessGrant {
    member_id: MemberId,
    /// Unix ミリ秒
    expires_at: i64,
}

#[derive(Debug, Default)]
struct TokenTable {
    access: HashMap<String, AccessGrant>,
    refresh: HashMap<String, MemberId>,
}

/// 認証のユースケース
///
/// トークンは不透明な UUID 文字列で、プロセス内にだけ保持します。
pub struct AuthUseCase {
    accounts: Arc<dyn AccountRepository>,
    clock: Arc<dyn Clock>,
    access_ttl: Duration,
    tokens: Mutex<TokenTable>,
    /// `/auth/refresh` の呼び出し回数（拒否も含む）
    refresh_calls: AtomicUsize,
}

impl AuthUseCase {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        clock: Arc<dyn Clock>,
        access_ttl: Duration,
    ) -> Self {
        Self {
            accounts,
            clock,
            access_ttl,
            tokens: Mutex::new(TokenTable::default()),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    /// メールアドレスとパスワードでログインし、トークンの組を発行する
    pub async fn login(&self, email: &str, pwd: &str) -> Result<TokenResponse, AuthError> {
        let account = self
            .accounts
            .find_by_email(email)
            .await
            .filter(|account| account.verify_password(pwd))
            .ok_or(AuthError::InvalidCredentials)?;

        let mut tokens = self.tokens.lock().await;
        let access_token = self.issue_access_token(&mut tokens, account.member_id);
        let refresh_token = Uuid::new_v4().to_string();
        tokens.refresh.insert(refresh_token.clone(), account.member_id);
        tracing::info!("Member {} logged in", account.member_id);

        Ok(TokenResponse {
            access_token,
            refresh_token: Some(refresh_token),
        })
    }

    /// リフレッシュトークンで新しいアクセストークンを発行する
    ///
    /// リフレッシュトークンはローテーションしない（応答に含めない）。
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        let mut tokens = self.tokens.lock().await;
        let member_id = *tokens
            .refresh
            .get(refresh_token)
            .ok_or(AuthError::InvalidRefreshToken)?;
        let access_token = self.issue_access_token(&mut tokens, member_id);
        tracing::info!("Access token refreshed for member {}", member_id);

        Ok(TokenResponse {
            access_token,
            refresh_token: None,
        })
    }

    /// アクセストークンを検証し、会員を返す
    pub async fn authenticate(&self, access_token: &str) -> Result<Account, AuthError> {
        let member_id = {
            let mut tokens = self.tokens.lock().await;
            let grant = *tokens
                .access
                .get(access_token)
                .ok_or(AuthError::InvalidAccessToken)?;
            if grant.expires_at <= self.clock.now_millis() {
                tokens.access.remove(access_token);
                return Err(AuthError::ExpiredAccessToken);
            }
            grant.member_id
        };

        self.accounts
            .find_by_id(member_id)
            .await
            .ok_or(AuthError::InvalidAccessToken)
    }

    /// 全てのアクセストークンを失効させる（リフレッシュトークンは残す）
    pub async fn revoke_access_tokens(&self) {
        let mut tokens = self.tokens.lock().await;
        let revoked = tokens.access.len();
        tokens.access.clear();
        tracing::info!("Revoked {} access tokens", revoked);
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn issue_access_token(&self, tokens: &mut TokenTable, member_id: MemberId) -> String {
        let ttl = i64::try_from(self.access_ttl.as_millis()).unwrap_or(i64::MAX);
        let token = Uuid::new_v4().to_string();
        tokens.access.insert(
            token.clone(),
            AccessGrant {
                member_id,
                expires_at: self.clock.now_millis().saturating_add(ttl),
            },
        );
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockAccountRepository;
    use barcart_shared::time::FixedClock;

    const NOW: i64 = 1_700_000_000_000;

    fn alice() -> Account {
        Account::new(1, "alice@barcart.dev", "alice", "gimlet")
    }

    fn accounts() -> Arc<MockAccountRepository> {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_email()
            .returning(|email| (email == "alice@barcart.dev").then(alice));
        accounts
            .expect_find_by_id()
            .returning(|member_id| (member_id == 1).then(alice));
        Arc::new(accounts)
    }

    fn usecase_with_ttl(ttl: Duration) -> AuthUseCase {
        AuthUseCase::new(accounts(), Arc::new(FixedClock::new(NOW)), ttl)
    }

    #[tokio::test]
    async fn test_login_issues_token_pair() {
        // テスト項目: 正しい認証情報でログインするとトークンの組が発行される
        // given (前提条件):
        let usecase = usecase_with_ttl(Duration::from_secs(60));

        // when (操作):
        let tokens = usecase.login("alice@barcart.dev", "gimlet").await.unwrap();

        // then (期待する結果):
        assert!(tokens.refresh_token.is_some());
        let member = usecase.authenticate(&tokens.access_token).await.unwrap();
        assert_eq!(member.member_id, 1);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_fails() {
        // テスト項目: パスワードが誤っている場合は InvalidCredentials になる
        // given (前提条件):
        let usecase = usecase_with_ttl(Duration::from_secs(60));

        // when (操作):
        let result = usecase.login("alice@barcart.dev", "martini").await;

        // then (期待する結果):
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_zero_ttl_token_is_expired_immediately() {
        // テスト項目: TTL 0 のアクセストークンは即座に期限切れになる
        // given (前提条件):
        let usecase = usecase_with_ttl(Duration::ZERO);
        let tokens = usecase.login("alice@barcart.dev", "gimlet").await.unwrap();

        // when (操作):
        let result = usecase.authenticate(&tokens.access_token).await;

        // then (期待する結果):
        assert_eq!(result, Err(AuthError::ExpiredAccessToken));
    }

    #[tokio::test]
    async fn test_refresh_issues_new_access_token_and_counts_calls() {
        // テスト項目: refresh で新しいアクセストークンが発行され、呼び出し回数が数えられる
        // given (前提条件):
        let usecase = usecase_with_ttl(Duration::from_secs(60));
        let tokens = usecase.login("alice@barcart.dev", "gimlet").await.unwrap();
        let refresh_token = tokens.refresh_token.unwrap();

        // when (操作):
        let refreshed = usecase.refresh(&refresh_token).await.unwrap();
        let rejected = usecase.refresh("bogus").await;

        // then (期待する結果):
        assert_ne!(refreshed.access_token, tokens.access_token);
        assert_eq!(refreshed.refresh_token, None);
        assert_eq!(rejected, Err(AuthError::InvalidRefreshToken));
        assert_eq!(usecase.refresh_count(), 2);
    }

    #[tokio::test]
    async fn test_revoke_access_tokens_keeps_refresh_tokens() {
        // テスト項目: revoke 後はアクセストークンが無効になるが、refresh は引き続き成功する
        // given (前提条件):
        let usecase = usecase_with_ttl(Duration::from_secs(60));
        let tokens = usecase.login("alice@barcart.dev", "gimlet").await.unwrap();

        // when (操作):
        usecase.revoke_access_tokens().await;

        // then (期待する結果):
        assert_eq!(
            usecase.authenticate(&tokens.access_token).await,
            Err(AuthError::InvalidAccessToken)
        );
        let refreshed = usecase.refresh(&tokens.refresh_token.unwrap()).await;
        assert!(refreshed.is_ok());
    }
}
