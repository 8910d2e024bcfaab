//! Signup, demo setup and the acting user of a request.

use std::sync::Arc;
use tracing::{info, warn};

use super::SqliteStore;
use crate::config::DemoUserConfig;
use crate::error::{AppError, Result};
use crate::types::{
    default_avatar, AccountType, Portfolio, SignupRequest, TraderIdentity, UserProfile,
};

pub struct UserService {
    store: Arc<SqliteStore>,
    demo_user: DemoUserConfig,
    starting_cash: f64,
}

impl UserService {
    pub fn new(store: Arc<SqliteStore>, demo_user: DemoUserConfig, starting_cash: f64) -> Self {
        Self {
            store,
            demo_user,
            starting_cash,
        }
    }

    /// Create a profile. Demo accounts also get a funded portfolio.
    pub fn signup(&self, request: SignupRequest) -> Result<UserProfile> {
        let name = request.name.trim();
        let email = request.email.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Please enter your name.".to_string()));
        }
        if !is_valid_email(email) {
            return Err(AppError::BadRequest(
                "Please enter a valid email address.".to_string(),
            ));
        }

        let user = UserProfile {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            avatar: default_avatar(name),
            account_type: request.account_type,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.store.save_user(&user)?;

        if user.account_type == AccountType::Demo {
            self.ensure_portfolio(&user.id)?;
        }

        info!("Signed up user {} ({:?})", user.id, user.account_type);
        Ok(user)
    }

    /// Follow the trader picked during demo setup.
    pub fn demo_setup(&self, user_id: &str, trader_id: &str) -> Result<()> {
        if self.store.get_trader(trader_id)?.is_none() {
            return Err(AppError::NotFound(format!("Trader {} not found", trader_id)));
        }
        self.ensure_portfolio(user_id)?;
        self.store.follow(user_id, trader_id)?;
        info!("Demo setup for {}: following {}", user_id, trader_id);
        Ok(())
    }

    pub fn get_user(&self, id: &str) -> Result<UserProfile> {
        self.store
            .get_user(id)?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Identity for a request naming `user_id`, or the demo user.
    pub fn resolve_identity(&self, user_id: Option<&str>) -> TraderIdentity {
        let Some(id) = user_id.map(str::trim).filter(|id| !id.is_empty()) else {
            return self.demo_identity();
        };
        if id == self.demo_user.id {
            return self.demo_identity();
        }

        match self.store.get_user(id) {
            Ok(Some(user)) => TraderIdentity {
                id: user.id,
                name: user.name,
                avatar: user.avatar,
            },
            Ok(None) => TraderIdentity {
                id: id.to_string(),
                name: id.to_string(),
                avatar: default_avatar(id),
            },
            Err(e) => {
                warn!("Failed to load user {}: {}", id, e);
                TraderIdentity {
                    id: id.to_string(),
                    name: id.to_string(),
                    avatar: default_avatar(id),
                }
            }
        }
    }

    fn demo_identity(&self) -> TraderIdentity {
        TraderIdentity {
            id: self.demo_user.id.clone(),
            name: self.demo_user.name.clone(),
            avatar: self.demo_user.avatar.clone(),
        }
    }

    fn ensure_portfolio(&self, user_id: &str) -> Result<()> {
        if self.store.get_portfolio(user_id)?.is_none() {
            self.store
                .save_portfolio(&Portfolio::with_cash(user_id, self.starting_cash))?;
        }
        Ok(())
    }
}

/// Loose check matching the signup form: an `@` and a `.`.
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@') && email.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::TraderService;

    fn setup() -> (UserService, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::new_in_memory().unwrap());
        TraderService::new(store.clone()).initialize_bot_traders().unwrap();
        let service = UserService::new(store.clone(), DemoUserConfig::default(), 100_000.0);
        (service, store)
    }

    fn signup(name: &str, email: &str, account_type: AccountType) -> SignupRequest {
        SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            account_type,
        }
    }

    #[test]
    fn test_email_check() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada.example.com"));
        assert!(!is_valid_email("ada@example"));
    }

    #[test]
    fn test_signup_demo_account() {
        let (service, store) = setup();
        let user = service
            .signup(signup("  Ada Lovelace ", "ada@example.com", AccountType::Demo))
            .unwrap();

        assert_eq!(user.name, "Ada Lovelace");
        assert!(user.avatar.contains("name=Ada%20Lovelace"));
        assert_eq!(service.get_user(&user.id).unwrap(), user);
        assert_eq!(store.get_portfolio(&user.id).unwrap().unwrap().cash, 100_000.0);
    }

    #[test]
    fn test_signup_brokerage_has_no_portfolio() {
        let (service, store) = setup();
        let user = service
            .signup(signup("Grace", "grace@example.com", AccountType::Brokerage))
            .unwrap();
        assert!(store.get_portfolio(&user.id).unwrap().is_none());
    }

    #[test]
    fn test_signup_validation() {
        let (service, _store) = setup();
        let err = service
            .signup(signup("Ada", "not-an-email", AccountType::Demo))
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Please enter a valid email address.");

        let err = service
            .signup(signup("   ", "ada@example.com", AccountType::Demo))
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_demo_setup_follows_trader() {
        let (service, store) = setup();
        service.demo_setup("user123", "bot-dca-deb").unwrap();
        assert_eq!(store.following("user123").unwrap(), vec!["bot-dca-deb".to_string()]);
        assert!(store.get_portfolio("user123").unwrap().is_some());

        let err = service.demo_setup("user123", "bot-nobody").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_resolve_identity() {
        let (service, _store) = setup();
        assert_eq!(service.resolve_identity(None).id, "user123");
        assert_eq!(service.resolve_identity(Some("  ")).name, "Demo User");

        let user = service
            .signup(signup("Grace", "grace@example.com", AccountType::Demo))
            .unwrap();
        let who = service.resolve_identity(Some(user.id.as_str()));
        assert_eq!(who.name, "Grace");

        let stranger = service.resolve_identity(Some("guest-7"));
        assert_eq!(stranger.name, "guest-7");
        assert!(stranger.avatar.starts_with("https://ui-avatars.com/api/?name=guest-7"));
    }
}
