//! First-run walkthrough for creating and inviting the bot account.

/// Printed when no config file exists, before the interactive prompts.
pub fn print_instructions() {
    println!("\n=== Bot Setup Instructions ===\n");
    println!("1. Go to https://discord.com/developers/applications");
    println!("2. Click 'New Application' and give it a name");
    println!("3. Open the 'Bot' section in the left sidebar and add a bot");
    println!("4. Under 'Token', click 'Copy' to copy your bot token");
    println!("5. Under 'Privileged Gateway Intents', enable:");
    println!("   - SERVER MEMBERS INTENT");
    println!("\n6. Open 'OAuth2' > 'URL Generator' in the left sidebar");
    println!("7. Under 'Scopes', select 'bot'");
    println!("8. Under 'Bot Permissions', select:");
    println!("   - Manage Channels");
    println!("   - Manage Roles");
    println!("   - Read Messages/View Channels");
    println!("9. Copy the generated URL, open it in your browser,");
    println!("   select your server and authorize the bot");
    println!("\n=== Configuration ===\n");
}
