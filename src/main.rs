use krill::Interpreter;

fn main() {
    env_logger::init();

    match Interpreter::new().repl() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("krill: {:#}", e);
            std::process::exit(1);
        }
    }
}
