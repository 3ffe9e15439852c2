use super::disambiguator::Disambiguation;
use super::lexicon_error::LexiconError;
use super::phone_set::{PhoneSet, WordPosition};
use super::symbol_table::SymbolTable;
use super::word_boundary::{WordBoundaryCategory, WordBoundaryTable};

/// Build the phone symbol table and its word-boundary categories in one pass
/// so both always agree on ids.
///
/// Layout: `<eps>`, every silence phone with its bare form then `_B _E _S _I`,
/// every nonsilence phone as `_B _E _S _I`, then `#0..=#silence_symbol`.
pub fn build_phone_tables(
    phone_set: &PhoneSet,
    disambiguation: &Disambiguation,
) -> Result<(SymbolTable, WordBoundaryTable), LexiconError> {
    let mut phones = SymbolTable::with_epsilon();
    let mut boundaries = WordBoundaryTable::new();

    for phone in phone_set.silence() {
        let id = phones.push(phone.as_str())?;
        boundaries.push(phone.as_str(), id, WordBoundaryCategory::Nonword);
        push_positional(&mut phones, &mut boundaries, phone)?;
    }
    for phone in phone_set.nonsilence() {
        push_positional(&mut phones, &mut boundaries, phone)?;
    }
    for symbol in disambiguation.symbols() {
        phones.push(symbol)?;
    }

    log::debug!(
        "Phone table has {} symbols, {} with word-boundary info",
        phones.len(),
        boundaries.len()
    );
    Ok((phones, boundaries))
}

fn push_positional(
    phones: &mut SymbolTable,
    boundaries: &mut WordBoundaryTable,
    phone: &str,
) -> Result<(), LexiconError> {
    for position in WordPosition::ALL {
        let label = position.tag(phone);
        let id = phones.push(label.as_str())?;
        boundaries.push(label, id, position.into());
    }
    Ok(())
}
