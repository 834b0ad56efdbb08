use std::collections::VecDeque;
use std::fmt;

use terminal_size::{Width, terminal_size};

use crate::app::ReportLevel;

/// A trait for printing reports clipped to the terminal width.
pub trait PrintableReport
where
    Self: fmt::Display,
{
    fn print(&self, level: ReportLevel) {
        match level {
            ReportLevel::Clipped => {
                if let Some((Width(w), _)) = terminal_size() {
                    for line in self.to_string().lines() {
                        println!("{}", clip_line(line, w as usize));
                    }
                } else {
                    println!("{}", self);
                }
            }
            ReportLevel::Full => println!("{}", self),
        }
    }
}

/// Clips `line` to `width` characters, marking the cut with "...".
pub fn clip_line(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        return line.to_string();
    }
    if width <= 3 {
        return line.chars().take(width).collect();
    }
    let mut clipped = line.chars().take(width - 3).collect::<String>();
    clipped.push_str("...");
    clipped
}

/// Peekable and bidirectional iterator for the location parser.
#[derive(Debug)]
pub struct TokenIterator<I>
where
    I: Clone,
{
    buf: VecDeque<I>,
    pos: usize,
}

impl<I> TokenIterator<I>
where
    I: Clone,
{
    pub fn new(arr: &[I]) -> Self {
        Self {
            buf: arr.iter().cloned().collect(),
            pos: 0,
        }
    }

    pub fn peek(&self) -> Option<&I> {
        self.buf.get(self.pos)
    }
}

impl<I> Iterator for TokenIterator<I>
where
    I: Clone,
{
    type Item = I;

    fn next(&mut self) -> Option<I> {
        let item = self.buf.get(self.pos).cloned();
        self.pos += 1;
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next() {
        let arr = vec![1, 2, 3];
        let mut iter = TokenIterator::new(&arr);
        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next(), Some(3));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn peek() {
        let arr = vec!['a', 'b'];
        let mut iter = TokenIterator::new(&arr);
        assert_eq!(iter.peek(), Some(&'a'));
        iter.next();
        assert_eq!(iter.peek(), Some(&'b'));
        iter.next();
        assert_eq!(iter.peek(), None);
    }

    #[test]
    fn clip_long_line() {
        assert_eq!(clip_line("abcdefgh", 6), "abc...");
        assert_eq!(clip_line("abc", 6), "abc");
        assert_eq!(clip_line("abcdef", 2), "ab");
    }
}
