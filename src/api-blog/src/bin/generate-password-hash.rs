use bcrypt::{DEFAULT_COST, hash};
use std::env;
use std::process;

/// Prints a bcrypt hash, e.g. for seeding a user row by hand.
fn main() {
    let args: Vec<String> = env::args().collect();

    let (password, cost) = match args.as_slice() {
        [_, password] => (password, DEFAULT_COST),
        [_, password, cost] => match cost.parse::<u32>() {
            Ok(cost) => (password, cost),
            Err(_) => usage(&args[0]),
        },
        _ => usage(args.first().map(String::as_str).unwrap_or("generate-password-hash")),
    };

    match hash(password, cost) {
        Ok(hashed) => println!("{}", hashed),
        Err(e) => {
            eprintln!("Error generating hash: {}", e);
            process::exit(1);
        }
    }
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <password> [cost]", program);
    eprintln!();
    eprintln!("Generate a bcrypt hash for the given password.");
    eprintln!("The cost defaults to {}; use the same value as session.bcrypt_cost.", DEFAULT_COST);
    eprintln!();
    eprintln!("Example:");
    eprintln!("  cargo run --bin generate-password-hash -- mypassword");
    process::exit(1);
}
