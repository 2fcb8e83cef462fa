use colored::Colorize;
use portal_settings::Settings;

fn or_unset(value: &str) -> String {
    if value.is_empty() {
        "(not set)".dimmed().to_string()
    } else {
        value.to_string()
    }
}

pub fn show(settings: &Settings) {
    let ad = &settings.azure_ad;
    println!("environment:   {}", or_unset(&settings.environment));
    println!("client id:     {}", or_unset(&ad.client_id));
    println!("api client id: {}", or_unset(&ad.api_client_id));
    println!("authority:     {}", ad.authority());
    println!("redirect uri:  {}", or_unset(&ad.redirect_uri()));
    println!("scopes:        {}", or_unset(&ad.effective_scopes().join(" ")));
    println!("web api:       {}", or_unset(&settings.web_api.base_url));
    println!(
        "telemetry:     {}",
        if settings.app_insights.is_configured() {
            "configured"
        } else {
            "not configured"
        }
    );

    for warning in settings.warnings() {
        eprintln!("{} {warning}", "WARN".yellow());
    }
}
