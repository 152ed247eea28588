//! Admin Password Hash Generator
//!
//! Prints an Argon2 PHC string for `GALLERY_ADMIN_PASSWORD_HASH`.
//!
//! Usage:
//!   cargo run -p gallery-api --bin hash-password -- 'the password'
//!   echo 'the password' | cargo run -p gallery-api --bin hash-password

use std::io::BufRead;

use gallery_api::hash_password;

fn main() {
    let password = match std::env::args().nth(1) {
        Some(password) => password,
        None => {
            let mut line = String::new();
            if let Err(e) = std::io::stdin().lock().read_line(&mut line) {
                eprintln!("Failed to read password from stdin: {}", e);
                std::process::exit(1);
            }
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        eprintln!("Password must not be empty");
        std::process::exit(1);
    }

    match hash_password(&password) {
        Ok(hash) => println!("{}", hash),
        Err(e) => {
            eprintln!("Failed to hash password: {}", e);
            std::process::exit(1);
        }
    }
}
