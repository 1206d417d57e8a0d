//! `cdnify config`: print the effective configuration.

use owo_colors::OwoColorize;

use cdnify::config::CdnConfig;

pub fn show_config(config: &CdnConfig) {
    let target = config.cdn_target();
    let source = if config.config_path.as_os_str().is_empty() {
        "defaults".to_string()
    } else {
        config.config_path.display().to_string()
    };

    println!("{} {}", "config:".bold(), source);
    println!(
        "{} {}",
        "cdn base url:".bold(),
        if target.is_empty() { "(not configured)" } else { target.base_url() }
    );
    println!("{} {}", "custom urls:".bold(), config.cdn.custom_urls.len());

    match config.page_cache_policy() {
        Some(policy) => println!(
            "{} {} (ttl {}s)",
            "page cache:".bold(),
            policy.application.name(),
            policy.ttl
        ),
        None => println!("{} {}", "page cache:".bold(), "unchanged".dimmed()),
    }

    let flags = [
        ("enabled", config.is_enabled()),
        ("debug", config.is_debug()),
        ("performance", config.is_performance_enabled()),
        ("optimize_images", config.optimize_images()),
        ("lazy_load_images", config.lazy_load_images()),
        ("optimize_javascript", config.optimize_javascript()),
        ("optimize_critical_path", config.optimize_critical_path()),
        ("convert_to_webp", config.convert_to_webp()),
        ("use_progressive_loading", config.use_progressive_loading()),
    ];
    for (name, on) in flags {
        if on {
            println!("  {:<24} {}", name, "on".green());
        } else {
            println!("  {:<24} {}", name, "off".dimmed());
        }
    }
}
