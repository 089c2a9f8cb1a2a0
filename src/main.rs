fn main() {
    if let Err(err) = birthday_lookup::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
