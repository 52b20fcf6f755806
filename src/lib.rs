pub trait Raw {
    fn raw(&self) -> &str;
}

pub trait Redact: Raw {
    fn redact(&self) -> String {
        let visible: String = self.raw().chars().take(4).collect();
        format!("{visible}***")
    }
}
