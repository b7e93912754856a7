//! Teaching the parser a new sign.
//!
//! `%` reads a percentage and `!` reads a flag. Flags are kept as a value
//! type of their own through an extension payload so they compose back to
//! the same text.
//!
//! Run with: cargo run --example custom_factory

use sigil::{parse_with, ExtensionValue, Factories, Parser, Result, Value, Writer};
use std::error::Error;

#[derive(Debug, Clone, PartialEq)]
struct Flag(bool);

impl ExtensionValue for Flag {
    fn kind(&self) -> &str {
        "flag"
    }

    fn compose(&self, writer: &mut Writer<'_>) -> Result<()> {
        writer.write(if self.0 { "!on" } else { "!off" });
        Ok(())
    }
}

fn flag(parser: &mut Parser<'_>) -> Result<Value> {
    let start = parser.value_start();
    match parser.reader_mut().read_identifier()? {
        "on" => Ok(Value::extension(Flag(true))),
        "off" => Ok(Value::extension(Flag(false))),
        other => Err(sigil::Error::format(
            start,
            parser.reader().position(),
            &format!("flag must be on or off, not {}", other),
        )),
    }
}

fn percentage(parser: &mut Parser<'_>) -> Result<Value> {
    let digits = parser.reader_mut().read_while(|c| c.is_ascii_digit());
    let percent: u32 = digits
        .parse()
        .map_err(|_| sigil::Error::custom(format!("bad percentage {:?}", digits)))?;
    Ok(Value::from(f64::from(percent) / 100.0))
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let mut factories = Factories::standard();
    factories.register('!', flag);
    factories.register('%', percentage);
    println!("Registered signs: {:?}", factories.signs());

    let doc = parse_with("{ Settings verbose !on tax %20 cache !off }", factories.clone())?;
    let settings = doc[0].as_composite().ok_or("expected a composite")?;

    let verbose = settings.get("verbose").and_then(|v| v.as_extension::<Flag>());
    println!("verbose: {:?}", verbose);
    println!("tax:     {}", settings.get("tax").ok_or("no tax")?.to::<f64>()?);

    let text = sigil::compose(&doc[0])?;
    println!("\nComposed:\n{}", text);
    assert_eq!(parse_with(&text, factories)?, doc);

    match sigil::parse_with("!maybe", Factories::standard()) {
        Err(e) => println!("Without the factory: {}", e),
        Ok(_) => println!("unexpected success"),
    }

    Ok(())
}
