/// Name of the session cookie carrying the access token
pub const SESSION_COOKIE: &str = "tn_session";

/// Path of the login page unauthenticated browsers are sent to
pub const LOGIN_PATH: &str = "/auth/login";

/// Path of the signup page
pub const SIGNUP_PATH: &str = "/auth/signup";
