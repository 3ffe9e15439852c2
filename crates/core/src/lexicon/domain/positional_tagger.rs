use super::phone_set::WordPosition;

/// Append the word-position suffix to every phone of one pronunciation.
///
/// A single phone is a singleton; longer sequences get begin, internal and
/// end markers. An empty pronunciation stays empty.
pub fn tag_positions(phones: &mut [String]) {
    let last = match phones.len() {
        0 => return,
        n => n - 1,
    };
    for (i, phone) in phones.iter_mut().enumerate() {
        let position = match i {
            _ if last == 0 => WordPosition::Singleton,
            0 => WordPosition::Begin,
            _ if i == last => WordPosition::End,
            _ => WordPosition::Internal,
        };
        phone.push_str(position.suffix());
    }
}
