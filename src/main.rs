fn main() {
    if let Err(err) = yolosplit::run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
