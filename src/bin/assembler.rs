use std::env;
use word10asm::assembler;
use word10asm::logging;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("No files were received. Correct usage: {} <file1>...", args[0]);
        std::process::exit(1);
    }

    for basename in &args[1..] {
        match assembler::assemble_file(basename) {
            Ok(_) => {}
            Err(err) => {
                logging::error(format!("{basename}: {err}"));
                std::process::exit(1);
            }
        }
    }
}
