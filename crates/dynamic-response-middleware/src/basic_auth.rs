//! HTTP Basic sign-in

use async_trait::async_trait;
use dynamic_response_core::auth::{AuthenticationError, Authenticator, BasicCredentials, User};
use dynamic_response_http::{Handler, Middleware, Request, Response, Result};
use std::sync::Arc;

/// Resolve an `Authorization` header to an active user
///
/// # Errors
///
/// Fails with the parse error for non-Basic or malformed headers,
/// [`AuthenticationError::InvalidCredentials`] when no user matches and
/// [`AuthenticationError::InactiveUser`] for disabled accounts.
pub async fn sign_in(
	authenticator: &dyn Authenticator,
	header: &str,
) -> std::result::Result<User, AuthenticationError> {
	let credentials = BasicCredentials::parse(header)?;
	let user = authenticator
		.authenticate(&credentials)
		.await?
		.ok_or(AuthenticationError::InvalidCredentials)?;

	if !user.is_active {
		return Err(AuthenticationError::InactiveUser);
	}
	Ok(user)
}

/// Signs in clients that send Basic credentials
///
/// Never rejects a request: when the credentials do not resolve to an active
/// user the request continues anonymously.
pub struct HttpBasicAuthenticationMiddleware {
	authenticator: Arc<dyn Authenticator>,
}

impl HttpBasicAuthenticationMiddleware {
	pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
		Self { authenticator }
	}
}

#[async_trait]
impl Middleware for HttpBasicAuthenticationMiddleware {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		if let Some(header) = request.authorization().map(str::to_owned) {
			match sign_in(self.authenticator.as_ref(), &header).await {
				Ok(user) => {
					tracing::debug!(user = %user.username, "Signed in with Basic credentials");
					request.user = Some(user);
				}
				Err(err) => tracing::warn!(error = %err, "Ignoring Basic credentials"),
			}
		}

		next.handle(request).await
	}

	fn should_continue(&self, request: &Request) -> bool {
		request.authorization().is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use dynamic_response_core::auth::StaticAuthenticator;
	use rstest::{fixture, rstest};

	struct WhoAmI;

	#[async_trait]
	impl Handler for WhoAmI {
		async fn handle(&self, request: Request) -> Result<Response> {
			let name = request.user.map(|u| u.username).unwrap_or_else(|| "anonymous".to_string());
			Ok(Response::ok().with_body(name))
		}
	}

	#[fixture]
	fn authenticator() -> StaticAuthenticator {
		StaticAuthenticator::new()
			.with_user(User::new(1, "alice").with_password("pw"))
			.with_user(User::new(2, "bob").with_password("pw").inactive())
	}

	#[rstest]
	#[case(BasicCredentials::new("alice", "pw").to_header_value(), Ok(1))]
	#[case(
		BasicCredentials::new("alice", "nope").to_header_value(),
		Err(AuthenticationError::InvalidCredentials)
	)]
	#[case(
		BasicCredentials::new("bob", "pw").to_header_value(),
		Err(AuthenticationError::InactiveUser)
	)]
	#[case(
		"Bearer token".to_string(),
		Err(AuthenticationError::UnsupportedScheme("Bearer".to_string()))
	)]
	#[tokio::test]
	async fn test_sign_in(
		authenticator: StaticAuthenticator,
		#[case] header: String,
		#[case] expected: std::result::Result<i64, AuthenticationError>,
	) {
		let result = sign_in(&authenticator, &header).await.map(|user| user.id);
		assert_eq!(result, expected);
	}

	#[rstest]
	#[case(None, "anonymous")]
	#[case(Some(BasicCredentials::new("alice", "pw").to_header_value()), "alice")]
	#[case(Some(BasicCredentials::new("alice", "bad").to_header_value()), "anonymous")]
	#[case(Some(BasicCredentials::new("bob", "pw").to_header_value()), "anonymous")]
	#[case(Some("Basic ***".to_string()), "anonymous")]
	#[tokio::test]
	async fn test_middleware_never_rejects(
		authenticator: StaticAuthenticator,
		#[case] header: Option<String>,
		#[case] expected: &str,
	) {
		let middleware = HttpBasicAuthenticationMiddleware::new(Arc::new(authenticator));
		let mut request = Request::get("/");
		if let Some(header) = header {
			request = request.with_header("Authorization", &header);
		}

		let response = middleware.process(request, Arc::new(WhoAmI)).await.unwrap();
		assert_eq!(response.status, http::StatusCode::OK);
		assert_eq!(response.body, expected);
	}
}
