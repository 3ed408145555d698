mod absolute;
mod emergency;
mod harness;
mod pulsed;
mod scheduling;
mod startup;
