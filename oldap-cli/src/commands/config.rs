use super::Execute;
use clap::Args;
use oldap_errors::Error;
use oldap_store::config::OldapConfig;

/// Print the configuration resolved from `OLDAP_TS_SERVER`, `OLDAP_TS_REPO`, `OLDAP_TS_USER`,
/// `OLDAP_REDIS_URL` and friends. Secrets (`OLDAP_TS_PASSWORD`, `OLDAP_JWT_SECRET`) are redacted.
#[derive(Args, Debug)]
pub(crate) struct Command;

impl Execute for Command {
    fn execute(&self) -> Result<(), Error> {
        let cfg = OldapConfig::from_env()?;
        println!("ts_server:  {}", cfg.ts_server);
        println!("ts_repo:    {}", cfg.ts_repo);
        println!("ts_user:    {}", cfg.ts_user.as_deref().unwrap_or("(none)"));
        println!(
            "ts_password: {}",
            if cfg.ts_password.is_some() { "(set)" } else { "(none)" }
        );
        println!(
            "redis_url:  {}",
            cfg.redis_url.as_deref().unwrap_or("(unset, using in-process cache)")
        );
        println!(
            "jwt_secret: {}",
            if cfg.jwt_secret.is_empty() { "(empty)" } else { "(set)" }
        );
        Ok(())
    }
}
