use qa_exec::{Engine, EngineConfig};

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::OutputArgs;

pub fn phrases_cmd(output: OutputArgs) -> i32 {
    let engine = match Engine::standard(EngineConfig::new()) {
        Ok(engine) => engine,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("failed to build engine: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let docs = engine.library().docs();

    if output.format == OutputFormat::Text && !output.quiet {
        for doc in docs {
            println!("{}", doc.description);
            for phrase in &doc.phrases {
                println!("    {}", phrase.replace('\n', "\\n"));
            }
        }
    } else {
        print_result(output.format, output.quiet, &docs);
    }
    exit_codes::SUCCESS
}
