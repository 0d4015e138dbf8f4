/// Example program to print the loaded configuration
///
/// Run with: cargo run -p mitra-config --example print_config

fn main() {
    let config = mitra_config::MitraConfig::load();

    println!("=== EcoMitra Motion Configuration ===\n");

    println!("Motion Settings:");
    println!("  Default Threshold: {}", config.motion.default_threshold);
    println!("  Settle Epsilon: {}", config.motion.settle_epsilon);
    println!("  Max Frame Delta: {}s", config.motion.max_frame_delta);
    println!("  Default Speed: {}", config.motion.default_speed);
    println!();

    println!("Walkthrough Settings:");
    println!("  Page: {:?}", config.walkthrough.page);
    println!(
        "  Viewport: {}x{}",
        config.walkthrough.viewport_width, config.walkthrough.viewport_height
    );
    println!("  Scroll Step: {}px", config.walkthrough.scroll_step);
    println!("  Frame Delta: {}s", config.walkthrough.frame_delta);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
