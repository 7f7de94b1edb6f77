mod test_asynchronous;
mod test_synchronous;
