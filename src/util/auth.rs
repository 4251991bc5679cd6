use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("expected `user/secret`")]
    Malformed,

    #[error("user is empty")]
    EmptyUser,

    #[error("secret is empty")]
    EmptySecret,
}

/// Credentials shared with the vault server, read from `server_auth`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAuth {
    pub user: String,
    secret: String,
}

/// One-shot credential sent as the `auth` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub user: String,
    pub salt: String,
    pub digest: String,
}

impl ServerAuth {
    pub fn new(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            secret: secret.into(),
        }
    }

    /// Signs `context` with a fresh salt.
    ///
    /// The context must be exactly what the server rebuilds from the request,
    /// e.g. `"exist report.txt"` or `"query annual report "`.
    pub fn sign(&self, context: &str) -> AuthToken {
        let salt = generate_salt();
        self.sign_with_salt(context, &salt)
    }

    pub fn sign_with_salt(&self, context: &str, salt: &str) -> AuthToken {
        AuthToken {
            user: self.user.clone(),
            salt: salt.to_string(),
            digest: compute_digest(context, salt, &self.secret),
        }
    }
}

impl FromStr for ServerAuth {
    type Err = AuthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (user, secret) = value.split_once('/').ok_or(AuthError::Malformed)?;
        if user.is_empty() {
            return Err(AuthError::EmptyUser);
        }
        if secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }
        Ok(ServerAuth::new(user, secret))
    }
}

#[cfg(test)]
impl AuthToken {
    /// Rebuilds the digest from the context and secret, as the server does.
    pub fn verify(&self, context: &str, secret: &str) -> bool {
        compute_digest(context, &self.salt, secret) == self.digest
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.user, self.salt, self.digest)
    }
}

#[cfg(test)]
impl FromStr for AuthToken {
    type Err = AuthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(user), Some(salt), Some(digest)) => Ok(AuthToken {
                user: user.to_string(),
                salt: salt.to_string(),
                digest: digest.to_string(),
            }),
            _ => Err(AuthError::Malformed),
        }
    }
}

pub fn generate_salt() -> String {
    rand::random::<u32>().to_string()
}

// sha256(context || salt || secret), lowercase hex
fn compute_digest(context: &str, salt: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(context.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> ServerAuth {
        ServerAuth::new("alice", "s3cret")
    }

    #[test]
    fn digest_matches_known_vector() {
        // echo -n "check1234s3cret" | sha256sum
        let token = alice().sign_with_salt("check", "1234");
        let mut hasher = Sha256::new();
        hasher.update(b"check1234s3cret");
        assert_eq!(token.digest, hex::encode(hasher.finalize()));
        assert_eq!(token.digest.len(), 64);
        assert!(token.digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn token_renders_as_user_salt_digest() {
        let token = alice().sign_with_salt("info", "42");
        let rendered = token.to_string();
        assert!(rendered.starts_with("alice/42/"));
        assert_eq!(rendered.parse::<AuthToken>().unwrap(), token);
    }

    #[test]
    fn verify_requires_identical_context_salt_and_secret() {
        let token = alice().sign("exist report.txt");
        assert!(token.verify("exist report.txt", "s3cret"));
        assert!(!token.verify("exist report.txT", "s3cret"));
        assert!(!token.verify("exist report.txt", "s3creT"));

        let mut tampered = token.clone();
        tampered.salt.push('0');
        assert!(!tampered.verify("exist report.txt", "s3cret"));
    }

    #[test]
    fn salts_are_numeric() {
        let salt = generate_salt();
        assert!(salt.parse::<u32>().is_ok());
    }

    #[test]
    fn parses_server_auth() {
        let auth: ServerAuth = "bob/pa/ss".parse().unwrap();
        assert_eq!(auth.user, "bob");
        assert_eq!(auth.secret, "pa/ss");

        assert_eq!("bob".parse::<ServerAuth>(), Err(AuthError::Malformed));
        assert_eq!("/pass".parse::<ServerAuth>(), Err(AuthError::EmptyUser));
        assert_eq!("bob/".parse::<ServerAuth>(), Err(AuthError::EmptySecret));
    }
}
