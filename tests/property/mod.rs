mod turn_properties;
