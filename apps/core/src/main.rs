fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match quickrun_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[quickrun-core] {error}");
            std::process::exit(2);
        }
    };

    if let Err(error) = quickrun_core::runtime::run_with_options(options) {
        eprintln!("[quickrun-core] runtime failed: {error}");
        std::process::exit(1);
    }
}
