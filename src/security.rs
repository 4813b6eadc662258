use std::path::PathBuf;
use std::{env, fs};

const TOKEN_SECRET_FILE: &'static str = "token.secret";

/// Server-held key material for signing bearer tokens.
///
/// Tokens are HMAC-signed, so the same secret both issues and verifies
/// them. The secret never leaves the process.
#[derive(Clone)]
pub struct Security {
    pub token_secret: Vec<u8>,
}

impl std::fmt::Debug for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Security")
    }
}

#[inline]
fn security_dir() -> PathBuf {
    PathBuf::from(env::var("SECURITY_DIR").unwrap_or("./security".to_string()))
}

impl Security {
    pub fn load() -> Security {
        if let Ok(secret) = env::var("ACCESS_TOKEN_SECRET") {
            tracing::info!("Using token secret from environment.");
            return Security {
                token_secret: secret.into_bytes(),
            };
        }

        let dir = security_dir();

        if cfg!(feature = "generate-security") {
            fs::create_dir_all(dir.clone())
                .expect("unable to create directory for storing security information");
        }

        tracing::info!("Loading token signing secret...");
        let secret = match fs::read(dir.join(TOKEN_SECRET_FILE)) {
            Ok(secret) => {
                tracing::info!("Token secret found and loaded.");
                secret
            }
            Err(_) => {
                tracing::info!(
                    "Token secret not found in '{}'.",
                    dir.join(TOKEN_SECRET_FILE).display()
                );

                if !cfg!(feature = "generate-security") {
                    panic!("Unable to load token signing secret.");
                }

                tracing::info!("Generating a new token secret.");
                let secret: Vec<u8> = (0..64).map(|_| rand::random::<u8>()).collect();

                fs::write(dir.join(TOKEN_SECRET_FILE), secret.as_slice())
                    .expect("unable to write token secret");

                secret
            }
        };

        Security {
            token_secret: secret,
        }
    }
}
