use std::fmt;

/// Comma delimited
pub(crate) struct Comma<L>(pub(crate) L);

/// ` and ` delimited
pub(crate) struct And<L>(pub(crate) L);

impl<L> fmt::Display for Comma<L>
where
    L: IntoIterator + Clone,
    L::Item: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = "";
        for i in self.0.clone() {
            write!(f, "{s}{i}")?;
            s = ", ";
        }
        Ok(())
    }
}

impl<L> fmt::Display for And<L>
where
    L: IntoIterator + Clone,
    L::Item: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = "";
        for i in self.0.clone() {
            write!(f, "{s}{i}")?;
            s = " and ";
        }
        Ok(())
    }
}

/// `n` positional markers: `?, ?, ?`
pub(crate) fn markers(n: usize) -> Comma<std::iter::Take<std::iter::Repeat<&'static str>>> {
    Comma(std::iter::repeat("?").take(n))
}
