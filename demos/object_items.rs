//! Print localized name, counters and instances of a performance object given its English name.
//!
//! Usage: `object_items [ENGLISH_OBJECT_NAME] [\\MACHINE]`

#[cfg(windows)]
fn main() {
    use pdh_util::perf::native::EnglishCounterTable;
    use pdh_util::*;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let english_name = args.next().unwrap_or_else(|| "Processor".to_owned());
    let machine = args.next();

    let pdh = Pdh::native();
    println!("Encoding: {:?}", pdh.encoding());

    let index = lookup_index_by_english_name(&EnglishCounterTable, &english_name);
    if index == 0 {
        println!("No counter named {:?} in the English table", english_name);
        return;
    }

    let name = match pdh.lookup_name(machine.as_deref(), index) {
        Ok(name) => name,
        Err(e) => {
            println!("Error while looking up name of index {}: {}", index, e);
            return;
        }
    };
    println!("[{}]: {} => {}", index, english_name, name);

    match pdh.enum_object_items(None, machine.as_deref(), &name, DetailLevel::Wizard) {
        Ok(items) => {
            println!("Counters:");
            for counter in items.counters() {
                println!("  {}", counter);
            }
            println!("Instances:");
            for instance in items.instances() {
                println!("  {}", instance);
            }
        }
        Err(e) => println!("Error while enumerating {:?}: {}", name, e),
    }
}

#[cfg(not(windows))]
fn main() {
    println!("PDH is only available on Windows.");
}
