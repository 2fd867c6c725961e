fn main() {
    if let Err(err) = cocomerge::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
