//! `jdump` — disassembler analogous to `javap -c`.
//!
//! Prints headers, constant pool, field/method signatures and disassembled
//! bytecode for each `.class` file given on the command line (or every
//! `.class` entry of a `.jar`).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use jloader::archive::Archive;
use jloader::class_file::ClassFile;
use jloader::render::render_class;

#[derive(Parser, Debug)]
#[command(name = "jdump", author, version, about = "Disassemble Java class files", long_about = None)]
struct Args {
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut had_error = false;
    for path in &args.files {
        if let Err(err) = dump_file(path) {
            eprintln!("{}: {err}", path.display());
            had_error = true;
        }
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn dump_file(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let is_jar = path.extension().and_then(|e| e.to_str()) == Some("jar");
    if is_jar {
        dump_jar(path)
    } else {
        let bytes = std::fs::read(path)?;
        let class = ClassFile::parse(&bytes)?;
        print!("{}", render_class(&class)?);
        Ok(())
    }
}

fn dump_jar(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut archive = Archive::open(path)?;
    for entry in archive.class_entries()? {
        match entry.result {
            Ok(class) => {
                println!("{}({}):", path.display(), entry.name);
                print!("{}", render_class(&class)?);
            }
            Err(err) => eprintln!("{}({}): {err}", path.display(), entry.name),
        }
    }
    Ok(())
}
