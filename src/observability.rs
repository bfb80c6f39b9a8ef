use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("salesgpt_chat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("salesgpt_chat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("salesgpt_chat.client.request_duration_seconds");

pub(crate) static DISPATCHES: Counter = Counter::new("salesgpt_chat.dispatch.started");
pub(crate) static DISPATCH_SUCCESSES: Counter = Counter::new("salesgpt_chat.dispatch.succeeded");
pub(crate) static DISPATCH_FAILURES: Counter = Counter::new("salesgpt_chat.dispatch.failed");
pub(crate) static DISPATCH_SKIPPED: Counter = Counter::new("salesgpt_chat.dispatch.skipped");
pub(crate) static DISPATCH_UNSUPPORTED: Counter =
    Counter::new("salesgpt_chat.dispatch.unsupported");
pub(crate) static DISPATCH_DURATION: Moments =
    Moments::new("salesgpt_chat.dispatch.duration_seconds");

pub(crate) static BOT_NAME_FETCHES: Counter = Counter::new("salesgpt_chat.bot_name.fetches");
pub(crate) static BOT_NAME_FAILURES: Counter = Counter::new("salesgpt_chat.bot_name.failures");

pub(crate) static ANALYTICS_EVENTS: Counter = Counter::new("salesgpt_chat.analytics.events");
pub(crate) static ANALYTICS_FAILURES: Counter = Counter::new("salesgpt_chat.analytics.failures");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&DISPATCHES);
    collector.register_counter(&DISPATCH_SUCCESSES);
    collector.register_counter(&DISPATCH_FAILURES);
    collector.register_counter(&DISPATCH_SKIPPED);
    collector.register_counter(&DISPATCH_UNSUPPORTED);
    collector.register_moments(&DISPATCH_DURATION);

    collector.register_counter(&BOT_NAME_FETCHES);
    collector.register_counter(&BOT_NAME_FAILURES);

    collector.register_counter(&ANALYTICS_EVENTS);
    collector.register_counter(&ANALYTICS_FAILURES);
}
