use std::time::{Duration, Instant};

pub const DEFAULT_OFFER_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome
{
    Accepted,
    Dismissed,
}

pub trait DeferredOffer
{
    fn prompt(&mut self) -> Outcome;
}

pub trait DisplayMode
{
    fn is_standalone(&self) -> bool;
}

struct HeldOffer
{
    offer: Box<dyn DeferredOffer>,
    received_at: Instant,
}

pub struct InstallPrompt
{
    held: Option<HeldOffer>,
    ttl: Duration,
}

impl Default for InstallPrompt
{
    fn default() -> Self
    {
        Self::new(DEFAULT_OFFER_TTL)
    }
}

impl InstallPrompt
{
    pub fn new(ttl: Duration) -> Self
    {
        Self { held: None, ttl }
    }

    pub fn offer(&mut self, offer: Box<dyn DeferredOffer>, now: Instant)
    {
        if self.held.is_some() {
            log::debug!("replacing pending install offer");
        }
        self.held = Some(HeldOffer {
            offer,
            received_at: now,
        });
    }

    pub fn expire(&mut self, now: Instant)
    {
        let stale = self
            .held
            .as_ref()
            .is_some_and(|held| now.saturating_duration_since(held.received_at) >= self.ttl);
        if stale {
            log::debug!("install offer expired");
            self.held = None;
        }
    }

    pub fn is_installable(&mut self, now: Instant) -> bool
    {
        self.expire(now);
        self.held.is_some()
    }

    /// Shows the held offer and consumes it. Returns `true` only when the
    /// user accepted; without an offer nothing is shown.
    pub fn show(&mut self, now: Instant) -> bool
    {
        self.expire(now);
        let Some(mut held) = self.held.take() else {
            return false;
        };
        let outcome = held.offer.prompt();
        log::info!("install prompt outcome: {outcome:?}");
        outcome == Outcome::Accepted
    }

    pub fn should_show_banner(
        &mut self,
        now: Instant,
        display: &dyn DisplayMode,
        dismissed: bool,
    ) -> bool
    {
        !dismissed && !display.is_standalone() && self.is_installable(now)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeOffer
    {
        outcome: Outcome,
        prompts: Rc<Cell<u32>>,
    }

    impl DeferredOffer for FakeOffer
    {
        fn prompt(&mut self) -> Outcome
        {
            self.prompts.set(self.prompts.get() + 1);
            self.outcome
        }
    }

    struct Display(bool);

    impl DisplayMode for Display
    {
        fn is_standalone(&self) -> bool
        {
            self.0
        }
    }

    fn fake(outcome: Outcome) -> (Box<dyn DeferredOffer>, Rc<Cell<u32>>)
    {
        let prompts = Rc::new(Cell::new(0));
        let offer: Box<dyn DeferredOffer> = Box::new(FakeOffer {
            outcome,
            prompts: Rc::clone(&prompts),
        });
        (offer, prompts)
    }

    #[test]
    fn test_show_without_offer()
    {
        let mut prompt = InstallPrompt::default();
        let now = Instant::now();
        assert!(!prompt.is_installable(now));
        assert!(!prompt.show(now));
    }

    #[test]
    fn test_offer_consumed_once()
    {
        let mut prompt = InstallPrompt::default();
        let now = Instant::now();
        let (offer, prompts) = fake(Outcome::Accepted);
        prompt.offer(offer, now);

        assert!(prompt.is_installable(now));
        assert!(prompt.show(now));
        assert!(!prompt.is_installable(now));
        assert!(!prompt.show(now));
        assert_eq!(prompts.get(), 1);
    }

    #[test]
    fn test_dismissed_outcome()
    {
        let mut prompt = InstallPrompt::default();
        let now = Instant::now();
        let (offer, _) = fake(Outcome::Dismissed);
        prompt.offer(offer, now);
        assert!(!prompt.show(now));
        assert!(!prompt.is_installable(now));
    }

    #[test]
    fn test_offer_expires()
    {
        let mut prompt = InstallPrompt::new(Duration::from_secs(10));
        let start = Instant::now();
        let (offer, prompts) = fake(Outcome::Accepted);
        prompt.offer(offer, start);

        assert!(prompt.is_installable(start + Duration::from_secs(9)));
        assert!(!prompt.show(start + Duration::from_secs(10)));
        assert_eq!(prompts.get(), 0);
    }

    #[test]
    fn test_newer_offer_replaces()
    {
        let mut prompt = InstallPrompt::default();
        let now = Instant::now();
        let (first, first_prompts) = fake(Outcome::Dismissed);
        let (second, second_prompts) = fake(Outcome::Accepted);
        prompt.offer(first, now);
        prompt.offer(second, now);

        assert!(prompt.show(now));
        assert_eq!(first_prompts.get(), 0);
        assert_eq!(second_prompts.get(), 1);
    }

    #[test]
    fn test_banner_rules()
    {
        let mut prompt = InstallPrompt::default();
        let now = Instant::now();
        assert!(!prompt.should_show_banner(now, &Display(false), false));

        let (offer, _) = fake(Outcome::Accepted);
        prompt.offer(offer, now);
        assert!(prompt.should_show_banner(now, &Display(false), false));
        assert!(!prompt.should_show_banner(now, &Display(true), false));
        assert!(!prompt.should_show_banner(now, &Display(false), true));
    }
}
