mod create_notifier_tests;
