use crate::context::{Options, Portal};
use anyhow::Result;
use colored::Colorize;
use portal_router::Navigation;
use portal_settings::Settings;

fn report(navigation: &Navigation) {
    let route = navigation.route.name.as_deref().unwrap_or("-");
    println!("{} {} ({route})", "->".green(), navigation.route.path);
    if navigation.denied() {
        eprintln!(
            "{} sign-in required; finish it in the browser, then run \
             `portal callback <url>` with the address you land on",
            "INFO".blue()
        );
    }
}

pub async fn open(settings: Settings, options: &Options, path: &str) -> Result<()> {
    let portal = Portal::build(settings, options)?;
    portal.start().await?;
    let navigation = portal.router.navigate(path).await?;
    report(&navigation);
    Ok(())
}

pub async fn callback(settings: Settings, options: &Options, url: &url::Url) -> Result<()> {
    let portal = Portal::build(settings, options)?;
    portal.navigator.set_location(url.clone());
    portal.start().await?;

    let mut path = url.path().to_string();
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }
    let navigation = portal.router.navigate(&path).await?;
    report(&navigation);
    if let Some(account) = portal.session.account() {
        println!("{} signed in as {}", "OK".green(), account.username.cyan());
    }
    Ok(())
}

pub async fn whoami(settings: Settings, options: &Options) -> Result<()> {
    let portal = Portal::build(settings, options)?;
    portal.start().await?;
    match portal.session.account() {
        Some(account) => {
            println!("{}", account.username);
            if let Some(name) = &account.name {
                println!("name:   {name}");
            }
            println!("tenant: {}", account.tenant_id);
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

pub async fn logout(settings: Settings, options: &Options) -> Result<()> {
    let portal = Portal::build(settings, options)?;
    portal.start().await?;
    portal.identity.logout().await;
    portal.session.clear();
    println!("{} signed out", "OK".green());
    Ok(())
}
