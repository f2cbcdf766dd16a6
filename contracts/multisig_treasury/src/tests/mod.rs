mod test_emergency;
mod test_properties;
mod test_treasury;
