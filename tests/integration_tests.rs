mod integration {
    mod app_tests;
    mod config_tests;
    mod delete_tests;
    mod report_tests;
    mod scan_tests;
}
