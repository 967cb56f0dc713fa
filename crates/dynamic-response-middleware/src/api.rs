//! API request detection
//!
//! A request is an API request when its `Accept` header lists one of the
//! configured API media types. API clients cannot follow a login redirect, so
//! they are asked for Basic credentials instead.

use crate::basic_auth::sign_in;
use async_trait::async_trait;
use dynamic_response_conf::Settings;
use dynamic_response_core::auth::{AuthenticationError, Authenticator};
use dynamic_response_core::negotiation::ApiDetection;
use dynamic_response_http::{Handler, Middleware, Request, Response, Result};
use http::header::ACCEPT;
use std::sync::Arc;

/// Realm announced in `WWW-Authenticate` challenges
pub const API_REALM: &str = "API";

/// Detects API requests and authenticates them with HTTP Basic
///
/// - sets `request.is_api` and `request.accepts`
/// - for an API request without a signed-in user that carries an
///   `Authorization` header, the credentials must resolve to an active user,
///   otherwise the answer is `401` with a Basic challenge
/// - for an API request, a redirect to `settings.login_url` becomes the same
///   `401`
///
/// # Examples
///
/// ```
/// use dynamic_response_conf::Settings;
/// use dynamic_response_core::auth::StaticAuthenticator;
/// use dynamic_response_http::{Handler, Middleware, Request, Response, Result};
/// use dynamic_response_middleware::ApiMiddleware;
/// use std::sync::Arc;
///
/// struct LoginRequired;
///
/// #[async_trait::async_trait]
/// impl Handler for LoginRequired {
///     async fn handle(&self, _request: Request) -> Result<Response> {
///         Ok(Response::redirect("/accounts/login/?next=/posts/"))
///     }
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let middleware = ApiMiddleware::new(
///     Arc::new(Settings::default()),
///     Arc::new(StaticAuthenticator::new()),
/// );
/// let request = Request::get("/posts/").with_header("Accept", "application/json");
/// let response = middleware.process(request, Arc::new(LoginRequired)).await.unwrap();
///
/// assert_eq!(response.status, http::StatusCode::UNAUTHORIZED);
/// assert_eq!(response.header("www-authenticate"), Some("Basic realm=\"API\""));
/// # });
/// ```
pub struct ApiMiddleware {
	settings: Arc<Settings>,
	authenticator: Arc<dyn Authenticator>,
}

impl ApiMiddleware {
	pub fn new(settings: Arc<Settings>, authenticator: Arc<dyn Authenticator>) -> Self {
		Self {
			settings,
			authenticator,
		}
	}

	fn detect(&self, request: &mut Request) {
		let detection = ApiDetection::detect(
			request.header(ACCEPT.as_str()),
			&self.settings.api_accept_types,
		);
		if detection.is_api {
			tracing::debug!(
				accepts = ?detection.accepts,
				path = %request.path(),
				"API request detected"
			);
		}
		request.is_api = detection.is_api;
		request.accepts = detection.accepts;
	}

	fn should_authorize(request: &Request) -> bool {
		request.is_api && !request.is_authenticated() && request.authorization().is_some()
	}

	fn is_login_redirect(&self, response: &Response) -> bool {
		response.is_redirect()
			&& response
				.location()
				.is_some_and(|location| location.starts_with(&self.settings.login_url))
	}

	fn require_authentication() -> Response {
		Response::basic_challenge(API_REALM)
	}
}

#[async_trait]
impl Middleware for ApiMiddleware {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		self.detect(&mut request);

		if Self::should_authorize(&request) {
			let header = request.authorization().unwrap_or_default().to_owned();
			match sign_in(self.authenticator.as_ref(), &header).await {
				Ok(user) => {
					tracing::debug!(
						user = %user.username,
						path = %request.path(),
						"API client signed in"
					);
					request.user = Some(user);
				}
				Err(AuthenticationError::Backend(message)) => {
					return Err(AuthenticationError::Backend(message).into());
				}
				Err(err) => {
					tracing::warn!(
						error = %err,
						path = %request.path(),
						"Rejected API credentials"
					);
					return Ok(Self::require_authentication());
				}
			}
		}

		let is_api = request.is_api;
		let response = next.handle(request).await?;

		if is_api && self.is_login_redirect(&response) {
			tracing::debug!("Converting login redirect into an authentication challenge");
			return Ok(Self::require_authentication());
		}
		Ok(response)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use dynamic_response_core::auth::{BasicCredentials, StaticAuthenticator, User};
	use http::StatusCode;
	use rstest::{fixture, rstest};

	/// Echoes the detection result and the signed-in user
	struct Echo;

	#[async_trait]
	impl Handler for Echo {
		async fn handle(&self, request: Request) -> Result<Response> {
			let user = request.user.as_ref().map(|u| u.username.as_str()).unwrap_or("-");
			let body = format!("{}|{}|{}", request.is_api, request.accepts.join(","), user);
			Ok(Response::ok().with_body(body))
		}
	}

	struct RedirectTo(&'static str);

	#[async_trait]
	impl Handler for RedirectTo {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Ok(Response::redirect(self.0))
		}
	}

	struct FailingAuthenticator;

	#[async_trait]
	impl Authenticator for FailingAuthenticator {
		async fn authenticate(
			&self,
			_credentials: &BasicCredentials,
		) -> std::result::Result<Option<User>, AuthenticationError> {
			Err(AuthenticationError::Backend("user store offline".to_string()))
		}
	}

	#[fixture]
	fn middleware() -> ApiMiddleware {
		let authenticator = StaticAuthenticator::new()
			.with_user(User::new(1, "alice").with_password("pw"))
			.with_user(User::new(2, "bob").with_password("pw").inactive());
		ApiMiddleware::new(Arc::new(Settings::default()), Arc::new(authenticator))
	}

	fn api_request() -> Request {
		Request::get("/posts/").with_header("Accept", "application/json")
	}

	#[rstest]
	#[case(None, "false||-")]
	#[case(Some("text/html"), "false|text/html|-")]
	#[case(Some("text/html, application/json;q=0.9"), "true|text/html,application/json|-")]
	#[tokio::test]
	async fn test_detection(
		middleware: ApiMiddleware,
		#[case] accept: Option<&str>,
		#[case] expected: &str,
	) {
		let mut request = Request::get("/");
		if let Some(accept) = accept {
			request = request.with_header("Accept", accept);
		}
		let response = middleware.process(request, Arc::new(Echo)).await.unwrap();
		assert_eq!(response.body, expected);
	}

	#[rstest]
	#[tokio::test]
	async fn test_valid_credentials_sign_in(middleware: ApiMiddleware) {
		let request = api_request().with_header(
			"Authorization",
			&BasicCredentials::new("alice", "pw").to_header_value(),
		);
		let response = middleware.process(request, Arc::new(Echo)).await.unwrap();
		assert_eq!(response.body, "true|application/json|alice");
	}

	#[rstest]
	#[case(BasicCredentials::new("alice", "wrong").to_header_value())]
	#[case(BasicCredentials::new("bob", "pw").to_header_value())]
	#[case("Digest username=alice".to_string())]
	#[case("Basic not-base64".to_string())]
	#[tokio::test]
	async fn test_bad_credentials_are_challenged(
		middleware: ApiMiddleware,
		#[case] header: String,
	) {
		let request = api_request().with_header("Authorization", &header);
		let response = middleware.process(request, Arc::new(Echo)).await.unwrap();
		assert_eq!(response.status, StatusCode::UNAUTHORIZED);
		assert_eq!(response.header("www-authenticate"), Some("Basic realm=\"API\""));
	}

	#[rstest]
	#[tokio::test]
	async fn test_browsers_are_not_authenticated(middleware: ApiMiddleware) {
		let request = Request::get("/").with_header("Authorization", "Digest whatever");
		let response = middleware.process(request, Arc::new(Echo)).await.unwrap();
		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.body, "false||-");
	}

	#[rstest]
	#[tokio::test]
	async fn test_signed_in_user_skips_basic_auth(middleware: ApiMiddleware) {
		let request = api_request()
			.with_header("Authorization", "Digest whatever")
			.with_user(User::new(9, "session-user"));
		let response = middleware.process(request, Arc::new(Echo)).await.unwrap();
		assert_eq!(response.body, "true|application/json|session-user");
	}

	#[rstest]
	#[case(true, "/accounts/login/?next=/x/", StatusCode::UNAUTHORIZED)]
	#[case(true, "/posts/", StatusCode::FOUND)]
	#[case(false, "/accounts/login/?next=/x/", StatusCode::FOUND)]
	#[tokio::test]
	async fn test_login_redirects(
		middleware: ApiMiddleware,
		#[case] is_api: bool,
		#[case] location: &'static str,
		#[case] expected: StatusCode,
	) {
		let request = if is_api { api_request() } else { Request::get("/") };
		let response = middleware.process(request, Arc::new(RedirectTo(location))).await.unwrap();
		assert_eq!(response.status, expected);
	}

	#[rstest]
	#[tokio::test]
	async fn test_backend_failure_propagates() {
		let middleware =
			ApiMiddleware::new(Arc::new(Settings::default()), Arc::new(FailingAuthenticator));
		let request = api_request().with_header(
			"Authorization",
			&BasicCredentials::new("alice", "pw").to_header_value(),
		);
		let result = middleware.process(request, Arc::new(Echo)).await;
		assert!(matches!(
			result,
			Err(dynamic_response_http::Error::Authentication(AuthenticationError::Backend(_)))
		));
	}
}
