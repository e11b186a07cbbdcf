use gazelle::{cmdline, Interpreter};

fn main() -> Result<(), cmdline::Error> {
    pretty_env_logger::init();
    let interp = Interpreter::new();
    if let Err(e) = interp.load_prelude() {
        for line in cmdline::render_error(&e) {
            eprintln!("{}", line);
        }
    }
    let args = std::env::args().collect();
    cmdline::launch(args, &interp)
}
