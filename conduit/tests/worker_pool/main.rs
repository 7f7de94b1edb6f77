mod test_asynchronous;
