fn main() {
    if let Err(err) = c4_puml_export::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
