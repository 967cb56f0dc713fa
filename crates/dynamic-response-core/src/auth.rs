//! Users and HTTP Basic credentials
//!
//! Credential validation itself lives behind the [`Authenticator`] trait; this
//! module only decodes the `Authorization` header and describes the user
//! model, which serializes as a sensitive identity.

use crate::serializers::{FieldMeta, Model, Serializable};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use std::collections::HashMap;

/// Authentication failures
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
	#[error("Unsupported authentication scheme: {0}")]
	UnsupportedScheme(String),
	#[error("Malformed credentials: {0}")]
	MalformedCredentials(String),
	#[error("Invalid credentials")]
	InvalidCredentials,
	#[error("User account is disabled")]
	InactiveUser,
	#[error("Authentication backend error: {0}")]
	Backend(String),
}

/// An account as seen by the response layer
///
/// Serializes to `id`, `email` and `first_name` only, whatever fields are
/// requested.
///
/// # Examples
///
/// ```
/// use dynamic_response_core::auth::User;
/// use dynamic_response_core::serializers::{Emitter, FieldSelection, Serializable};
/// use serde_json::json;
///
/// let user = User::new(1, "alice").with_email("alice@example.com").with_password("pw");
/// let selection = FieldSelection::from(["password", "username"]);
/// let emitted = Emitter::default()
///     .construct(&Serializable::object(user), Some(&selection))
///     .unwrap();
/// assert_eq!(emitted, json!({"id": 1, "email": "alice@example.com", "first_name": ""}));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
	pub id: i64,
	pub username: String,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub password: String,
	pub is_active: bool,
}

impl User {
	pub fn new(id: i64, username: impl Into<String>) -> Self {
		Self {
			id,
			username: username.into(),
			email: String::new(),
			first_name: String::new(),
			last_name: String::new(),
			password: String::new(),
			is_active: true,
		}
	}

	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = email.into();
		self
	}

	pub fn with_name(
		mut self,
		first_name: impl Into<String>,
		last_name: impl Into<String>,
	) -> Self {
		self.first_name = first_name.into();
		self.last_name = last_name.into();
		self
	}

	pub fn with_password(mut self, password: impl Into<String>) -> Self {
		self.password = password.into();
		self
	}

	pub fn inactive(mut self) -> Self {
		self.is_active = false;
		self
	}

	pub fn full_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
			.trim()
			.to_string()
	}
}

impl Model for User {
	fn model_name(&self) -> &str {
		"auth.user"
	}

	fn fields(&self) -> Vec<FieldMeta> {
		vec![
			FieldMeta::plain("id"),
			FieldMeta::plain("username"),
			FieldMeta::plain("first_name"),
			FieldMeta::plain("last_name"),
			FieldMeta::plain("email"),
			FieldMeta::plain("password").non_serializable(),
			FieldMeta::plain("is_active"),
		]
	}

	fn get_attribute(&self, name: &str) -> Option<Serializable> {
		match name {
			"id" => Some(self.id.into()),
			"username" => Some(self.username.clone().into()),
			"first_name" => Some(self.first_name.clone().into()),
			"last_name" => Some(self.last_name.clone().into()),
			"email" => Some(self.email.clone().into()),
			"password" => Some(self.password.clone().into()),
			"is_active" => Some(self.is_active.into()),
			"full_name" => Some(self.full_name().into()),
			_ => None,
		}
	}

	fn is_sensitive_identity(&self) -> bool {
		true
	}
}

/// Username and password decoded from an `Authorization: Basic` header
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
	pub username: String,
	pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BasicCredentials")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}

impl BasicCredentials {
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			username: username.into(),
			password: password.into(),
		}
	}

	/// Decode an `Authorization` header value
	///
	/// The scheme is matched case-insensitively; the password may contain `:`.
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::auth::BasicCredentials;
	///
	/// // "alice:secret:123"
	/// let creds = BasicCredentials::parse("basic YWxpY2U6c2VjcmV0OjEyMw==").unwrap();
	/// assert_eq!(creds.username, "alice");
	/// assert_eq!(creds.password, "secret:123");
	///
	/// assert!(BasicCredentials::parse("Bearer abc").is_err());
	/// ```
	pub fn parse(header: &str) -> Result<Self, AuthenticationError> {
		let (scheme, encoded) = header.trim().split_once(' ').ok_or_else(|| {
			AuthenticationError::MalformedCredentials("missing credentials".to_string())
		})?;
		if !scheme.eq_ignore_ascii_case("basic") {
			return Err(AuthenticationError::UnsupportedScheme(scheme.to_string()));
		}

		let decoded = STANDARD
			.decode(encoded.trim())
			.map_err(|e| AuthenticationError::MalformedCredentials(e.to_string()))?;
		let decoded = String::from_utf8(decoded)
			.map_err(|e| AuthenticationError::MalformedCredentials(e.to_string()))?;
		let (username, password) = decoded.split_once(':').ok_or_else(|| {
			AuthenticationError::MalformedCredentials("missing ':' separator".to_string())
		})?;

		Ok(Self::new(username, password))
	}

	/// Header value carrying these credentials
	pub fn to_header_value(&self) -> String {
		let raw = format!("{}:{}", self.username, self.password);
		format!("Basic {}", STANDARD.encode(raw))
	}
}

/// Validates credentials against a user store
#[async_trait]
pub trait Authenticator: Send + Sync {
	/// `Ok(None)` when the credentials match no user
	async fn authenticate(
		&self,
		credentials: &BasicCredentials,
	) -> Result<Option<User>, AuthenticationError>;
}

/// An in-memory [`Authenticator`]
///
/// # Examples
///
/// ```
/// use dynamic_response_core::auth::{Authenticator, BasicCredentials, StaticAuthenticator, User};
///
/// # async fn example() {
/// let auth = StaticAuthenticator::new().with_user(User::new(1, "alice").with_password("pw"));
/// let found = auth.authenticate(&BasicCredentials::new("alice", "pw")).await.unwrap();
/// assert_eq!(found.unwrap().id, 1);
/// assert!(auth.authenticate(&BasicCredentials::new("alice", "no")).await.unwrap().is_none());
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(example());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticAuthenticator {
	users: HashMap<String, User>,
}

impl StaticAuthenticator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_user(mut self, user: User) -> Self {
		self.add_user(user);
		self
	}

	pub fn add_user(&mut self, user: User) {
		self.users.insert(user.username.clone(), user);
	}
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
	async fn authenticate(
		&self,
		credentials: &BasicCredentials,
	) -> Result<Option<User>, AuthenticationError> {
		Ok(self
			.users
			.get(&credentials.username)
			.filter(|user| user.password == credentials.password)
			.cloned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::serializers::{Emitter, FieldSelection, TypeRegistry};
	use rstest::rstest;
	use std::sync::Arc;
	use serde_json::json;

	#[rstest]
	#[case("Basic")]
	#[case("Basic !!!")]
	#[case("Basic bm9jb2xvbg==")]
	fn test_malformed_headers(#[case] header: &str) {
		assert!(matches!(
			BasicCredentials::parse(header),
			Err(AuthenticationError::MalformedCredentials(_))
		));
	}

	#[rstest]
	fn test_unsupported_scheme() {
		assert_eq!(
			BasicCredentials::parse("Digest abc"),
			Err(AuthenticationError::UnsupportedScheme("Digest".to_string()))
		);
	}

	#[rstest]
	fn test_header_round_trip() {
		let creds = BasicCredentials::new("bob", "p:w");
		assert_eq!(BasicCredentials::parse(&creds.to_header_value()).unwrap(), creds);
	}

	#[rstest]
	fn test_debug_hides_password() {
		let creds = BasicCredentials::new("bob", "hunter2");
		assert!(!format!("{:?}", creds).contains("hunter2"));
	}

	fn password_as_email() -> TypeRegistry {
		TypeRegistry::builder()
			.accessor("auth.user", "email", |user: &dyn Model| {
				user.get_attribute("password").unwrap_or(Serializable::Null)
			})
			.build()
	}

	#[rstest]
	#[case(TypeRegistry::empty(), None)]
	#[case(TypeRegistry::empty(), Some(FieldSelection::from(["password"])))]
	#[case(
		TypeRegistry::empty(),
		Some(FieldSelection::from(["username", "last_name", "is_active"]))
	)]
	#[case(password_as_email(), Some(FieldSelection::from(["email"])))]
	#[case(password_as_email(), None)]
	fn test_user_is_always_redacted(
		#[case] registry: TypeRegistry,
		#[case] selection: Option<FieldSelection>,
	) {
		let user = User::new(5, "carol")
			.with_email("c@example.com")
			.with_name("Carol", "Smith")
			.with_password("secret");
		let emitted = Emitter::new(Arc::new(registry))
			.construct(&Serializable::object(user), selection.as_ref())
			.unwrap();
		assert_eq!(
			emitted,
			json!({"id": 5, "email": "c@example.com", "first_name": "Carol"})
		);
	}

	#[tokio::test]
	async fn test_static_authenticator() {
		let auth = StaticAuthenticator::new().with_user(User::new(1, "alice").with_password("pw"));
		let creds = BasicCredentials::new("nobody", "pw");
		assert!(auth.authenticate(&creds).await.unwrap().is_none());
	}
}
