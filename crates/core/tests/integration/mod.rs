/// End-to-end dispatch scenarios run against the public `Scheduler` API.
mod scenarios;
