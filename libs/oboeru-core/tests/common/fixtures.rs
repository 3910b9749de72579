//! Sample deck content.

/// Generate a deck with `num_cards` single-line cards under a tagged heading.
pub fn single_line_deck(num_cards: usize) -> String {
    let mut content = String::from("# Sample deck #flashcards\n\n");
    for i in 0..num_cards {
        content.push_str(&format!("Question {} :: Answer {}\n", i + 1, i + 1));
    }
    content
}

/// A deck mixing both card shapes with prose between them.
pub fn mixed_deck() -> &'static str {
    "# Rust #flashcards\n\
     \n\
     Some notes that are not cards.\n\
     \n\
     What is ownership? :: Each value has a single owner\n\
     \n\
     Explain borrowing\n\
     ?\n\
     Borrowing allows references without ownership.\n\
     Multiple lines are supported.\n\
     +++\n\
     \n\
     Unfinished block\n\
     ?\n\
     this block never ends\n\
     \n\
     What does `?` do? :: Propagates errors\n"
}
