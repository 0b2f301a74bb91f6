//! SMS login and logout.
//!
//! Login is two round-trips: request a one-time code, then confirm it
//! for a token pair. The pair lands in the system keyring; the phone
//! number is written back into the profile so re-login needs no args.

use dialoguer::Input;

use geoblink_config as config;

use crate::cli::GlobalOpts;
use crate::context::{AppContext, active_profile_name};
use crate::error::CliError;

pub async fn login(phone: Option<String>, global: &GlobalOpts) -> Result<(), CliError> {
    let mut ctx = AppContext::build(global)?;

    let phone = match phone.or_else(|| ctx.profile_phone()) {
        Some(phone) => phone,
        None => Input::<String>::new()
            .with_prompt("Phone number")
            .interact_text()?,
    };

    ctx.client.request_code(&phone).await?;
    if !global.quiet {
        eprintln!("Code sent to {phone}.");
    }

    let code: String = Input::new().with_prompt("SMS code").interact_text()?;
    let grant = ctx.client.confirm_code(&phone, &code).await?;

    config::store_session(&ctx.profile_name, &grant.token, &grant.u_hash)?;
    remember_phone(&mut ctx, &phone)?;

    if !global.quiet {
        eprintln!("Logged in on profile '{}'.", ctx.profile_name);
    }
    Ok(())
}

pub fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    config::clear_session(&profile_name)?;
    if !global.quiet {
        eprintln!("Logged out of profile '{profile_name}'.");
    }
    Ok(())
}

/// Save the phone (and, for ad-hoc `--server` logins, a new profile)
/// back to the config file.
fn remember_phone(ctx: &mut AppContext, phone: &str) -> Result<(), CliError> {
    if let Some(profile) = ctx.cfg.profiles.get_mut(&ctx.profile_name) {
        profile.phone = Some(phone.to_owned());
    } else {
        ctx.cfg.profiles.insert(
            ctx.profile_name.clone(),
            config::Profile {
                server: ctx.client.base_url().to_string(),
                phone: Some(phone.to_owned()),
                insecure: None,
                timeout: None,
                refresh_interval: None,
            },
        );
        if ctx.cfg.default_profile.is_none() {
            ctx.cfg.default_profile = Some(ctx.profile_name.clone());
        }
    }

    config::save_config(&ctx.cfg)?;
    Ok(())
}
